//! Wrapper for the remote `database_*` method family.

use std::collections::BTreeMap;
use testkit_bridge::{Args, BridgeError, Client, Handle, Result, Value};
use tracing::debug;

/// Client for the database object family of a test server.
pub struct Database {
    client: Client,
}

impl Database {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(base_url)?,
        })
    }

    /// The underlying bridge client, for invocations this wrapper does
    /// not cover.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create (or open) a database on the server, returning its handle.
    pub async fn create(&self, name: &str) -> Result<Handle> {
        debug!("creating database {:?}", name);
        let mut args = Args::new();
        args.set_string("name", name);
        self.client.invoke("database_create", &args).await?.into_pointer()
    }

    pub async fn close(&self, database: &Handle) -> Result<()> {
        let mut args = Args::new();
        args.set_handle("database", database);
        self.client.invoke("database_close", &args).await?;
        Ok(())
    }

    /// Delete the database's backing store on the server.
    pub async fn delete_db(&self, database: &Handle) -> Result<()> {
        let mut args = Args::new();
        args.set_handle("database", database);
        self.client.invoke("database_deleteDB", &args).await?;
        Ok(())
    }

    pub async fn exists(&self, name: &str, directory: &str) -> Result<bool> {
        let mut args = Args::new();
        args.set_string("name", name).set_string("directory", directory);
        let result = self.client.invoke("database_exists", &args).await?;
        expect_bool(result)
    }

    pub async fn get_name(&self, database: &Handle) -> Result<String> {
        let mut args = Args::new();
        args.set_handle("database", database);
        self.client.invoke("database_getName", &args).await?.into_string()
    }

    pub async fn get_path(&self, database: &Handle) -> Result<String> {
        let mut args = Args::new();
        args.set_handle("database", database);
        self.client.invoke("database_getPath", &args).await?.into_string()
    }

    pub async fn get_count(&self, database: &Handle) -> Result<i64> {
        let mut args = Args::new();
        args.set_handle("database", database);
        let result = self.client.invoke("database_getCount", &args).await?;
        result.as_i64().ok_or_else(|| BridgeError::UnexpectedValue {
            expected: "int",
            actual: result.type_name().to_string(),
        })
    }

    /// Fetch a document handle by id. A missing document yields `None`;
    /// a null id is a server-side error and surfaces as an invocation
    /// error (the server's message text is preserved).
    pub async fn get_document(&self, database: &Handle, id: Option<&str>) -> Result<Option<Handle>> {
        let mut args = Args::new();
        args.set_handle("database", database);
        match id {
            Some(id) => args.set_string("id", id),
            None => args.set_null("id"),
        };
        match self.client.invoke("database_getDocument", &args).await? {
            Value::Null => Ok(None),
            other => other.into_pointer().map(Some),
        }
    }

    pub async fn save(&self, database: &Handle, document: &Handle) -> Result<()> {
        let mut args = Args::new();
        args.set_handle("database", database).set_handle("document", document);
        self.client.invoke("database_save", &args).await?;
        Ok(())
    }

    pub async fn delete_document(&self, database: &Handle, document: &Handle) -> Result<()> {
        let mut args = Args::new();
        args.set_handle("database", database).set_handle("document", document);
        self.client.invoke("database_deleteDocument", &args).await?;
        Ok(())
    }

    pub async fn contains(&self, database: &Handle, id: &str) -> Result<bool> {
        let mut args = Args::new();
        args.set_handle("database", database).set_string("id", id);
        let result = self.client.invoke("database_contains", &args).await?;
        expect_bool(result)
    }

    /// All document ids in the database.
    pub async fn get_doc_ids(&self, database: &Handle) -> Result<Vec<String>> {
        let mut args = Args::new();
        args.set_handle("database", database);
        let result = self.client.invoke("database_getDocIds", &args).await?;
        match result {
            Value::Array(items) => items.into_iter().map(Value::into_string).collect(),
            other => Err(BridgeError::UnexpectedValue {
                expected: "array",
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Fetch the bodies of the given documents as an id-to-body mapping.
    pub async fn get_documents(
        &self,
        database: &Handle,
        ids: Vec<String>,
    ) -> Result<BTreeMap<String, Value>> {
        let mut args = Args::new();
        args.set_handle("database", database)
            .set_array("ids", ids.into_iter().map(Value::String).collect());
        let result = self.client.invoke("database_getDocuments", &args).await?;
        match result {
            Value::Dict(entries) => Ok(entries),
            other => Err(BridgeError::UnexpectedValue {
                expected: "dict",
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Save a batch of documents supplied as a JSON body payload.
    pub async fn save_documents(
        &self,
        database: &Handle,
        documents: &serde_json::Value,
    ) -> Result<()> {
        let mut args = Args::new();
        args.set_handle("database", database);
        self.client
            .invoke_with_body("database_saveDocuments", &args, documents)
            .await?;
        Ok(())
    }

    /// Free the remote object behind a handle obtained from this family.
    pub async fn release(&self, handle: &Handle) -> Result<()> {
        self.client.release(handle).await
    }
}

fn expect_bool(value: Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| BridgeError::UnexpectedValue {
        expected: "bool",
        actual: value.type_name().to_string(),
    })
}
