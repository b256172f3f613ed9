use devhub_data::{decode_base64, decode_text_option, JsonValue};
use devhub_primitives::PostId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};


#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    AddPost,
    EditPost
}


impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add_post" => Some(Method::AddPost),
            "edit_post" => Some(Method::EditPost),
            _ => None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::AddPost => "add_post",
            Method::EditPost => "edit_post"
        }
    }
}


impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Mutable part of a post as submitted to the contract.
///
/// The contract versions its body enum, so everything but the
/// discriminator is optional and unknown fields are ignored.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PostBody {
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `Some(Null)` when the call passed an explicit `null`
    #[serde(default, deserialize_with = "keep_null")]
    pub sponsorship_token: Option<JsonValue>,
    #[serde(default, deserialize_with = "decode_text_option")]
    pub amount: Option<String>,
    #[serde(default)]
    pub supervisor: Option<String>
}


#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AddPostArgs {
    #[serde(default)]
    pub parent_id: Option<PostId>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub body: PostBody
}


#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EditPostArgs {
    /// Informational only, the edited post is identified by the storage write
    #[serde(default, deserialize_with = "lenient_post_id")]
    pub id: Option<PostId>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub body: PostBody
}


fn keep_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonValue>, D::Error> {
    JsonValue::deserialize(deserializer).map(Some)
}


/// Accepts a number or a numeric string, anything else becomes `None`
fn lenient_post_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PostId>, D::Error> {
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None
    })
}


#[derive(Debug, Clone, PartialEq)]
pub enum PostArgs {
    AddPost(AddPostArgs),
    EditPost(EditPostArgs)
}


impl PostArgs {
    pub fn method(&self) -> Method {
        match self {
            PostArgs::AddPost(_) => Method::AddPost,
            PostArgs::EditPost(_) => Method::EditPost
        }
    }

    pub fn labels(&self) -> &[String] {
        match self {
            PostArgs::AddPost(args) => &args.labels,
            PostArgs::EditPost(args) => &args.labels
        }
    }

    pub fn body(&self) -> &PostBody {
        match self {
            PostArgs::AddPost(args) => &args.body,
            PostArgs::EditPost(args) => &args.body
        }
    }
}


#[derive(Debug)]
pub enum ArgsError {
    Base64(base64::DecodeError),
    Utf8(std::str::Utf8Error),
    Json(serde_json::Error),
    Shape(serde_json::Error)
}


impl Display for ArgsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgsError::Base64(err) => write!(f, "invalid base64: {}", err),
            ArgsError::Utf8(err) => write!(f, "args are not utf-8 text: {}", err),
            ArgsError::Json(err) => write!(f, "args are not valid json: {}", err),
            ArgsError::Shape(err) => write!(f, "unexpected args shape: {}", err)
        }
    }
}


impl std::error::Error for ArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgsError::Base64(err) => Some(err),
            ArgsError::Utf8(err) => Some(err),
            ArgsError::Json(err) => Some(err),
            ArgsError::Shape(err) => Some(err)
        }
    }
}


/// Decodes base64 encoded JSON call arguments.
///
/// Returns the typed arguments together with the untouched JSON value.
pub fn decode_args(method: Method, args_base64: &str) -> Result<(PostArgs, JsonValue), ArgsError> {
    let bytes = decode_base64(args_base64).map_err(ArgsError::Base64)?;
    let text = std::str::from_utf8(&bytes).map_err(ArgsError::Utf8)?;
    let raw: JsonValue = serde_json::from_str(text).map_err(ArgsError::Json)?;

    let args = match method {
        Method::AddPost => AddPostArgs::deserialize(&raw).map(PostArgs::AddPost),
        Method::EditPost => EditPostArgs::deserialize(&raw).map(PostArgs::EditPost)
    }.map_err(ArgsError::Shape)?;

    Ok((args, raw))
}
