use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter};


#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<JsonValue>
}


/// Top level `errors` of a response that otherwise came back with HTTP 200
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlErrors(pub Vec<GraphqlError>);


impl Display for GraphqlErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("graphql request failed")?;
        for (i, err) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, err.message)?;
        }
        Ok(())
    }
}


impl std::error::Error for GraphqlErrors {}


#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>
}


pub fn check_response(body: &[u8]) -> anyhow::Result<()> {
    let response: Response = serde_json::from_slice(body)?;
    match response.errors {
        Some(errors) if !errors.is_empty() => Err(GraphqlErrors(errors).into()),
        _ => Ok(())
    }
}
