#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Table {
    Dumps,
    Posts,
    PostSnapshots
}


impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Dumps => "dumps",
            Table::Posts => "posts",
            Table::PostSnapshots => "post_snapshots"
        }
    }

    fn operation_name(&self) -> &'static str {
        match self {
            Table::Dumps => "CreateDump",
            Table::Posts => "CreatePost",
            Table::PostSnapshots => "CreatePostSnapshot"
        }
    }

    fn primary_key(&self) -> &'static [&'static str] {
        match self {
            Table::Dumps => &["receipt_id"],
            Table::Posts => &["id"],
            Table::PostSnapshots => &["post_id", "block_height"]
        }
    }

    /// Columns overwritten when a row with the same key already exists
    fn update_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Dumps => &["method_name", "block_height", "args", "caller", "post_id"],
            Table::Posts => &["parent_id", "author_id"],
            Table::PostSnapshots => &[
                "editor_id",
                "labels",
                "post_type",
                "description",
                "name",
                "sponsorship_token",
                "sponsorship_amount",
                "sponsorship_supervisor"
            ]
        }
    }
}


/// Prepared `insert_<table>_one` upsert document
#[derive(Debug, Clone)]
pub struct Mutation {
    pub table: Table,
    pub operation_name: &'static str,
    pub document: String
}


impl Mutation {
    pub fn upsert(table_prefix: &str, table: Table) -> Self {
        let table_name = if table_prefix.is_empty() {
            table.name().to_string()
        } else {
            format!("{}_{}", table_prefix, table.name())
        };

        let document = format!(
            "mutation {}($object: {}_insert_input!) {{ insert_{}_one(object: $object, on_conflict: {{constraint: {}_pkey, update_columns: [{}]}}) {{ {} }} }}",
            table.operation_name(),
            table_name,
            table_name,
            table.name(),
            table.update_columns().join(", "),
            table.primary_key().join(" ")
        );

        Self {
            table,
            operation_name: table.operation_name(),
            document
        }
    }
}


#[derive(Debug, Clone)]
pub struct Mutations {
    pub dumps: Mutation,
    pub posts: Mutation,
    pub post_snapshots: Mutation
}


impl Mutations {
    pub fn new(table_prefix: &str) -> Self {
        Self {
            dumps: Mutation::upsert(table_prefix, Table::Dumps),
            posts: Mutation::upsert(table_prefix, Table::Posts),
            post_snapshots: Mutation::upsert(table_prefix, Table::PostSnapshots)
        }
    }
}
