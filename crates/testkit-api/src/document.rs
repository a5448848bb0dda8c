//! Wrapper for the remote `document_*` method family.

use std::collections::BTreeMap;
use testkit_bridge::{Args, BridgeError, Client, Handle, Result, Value};

/// Client for the document object family of a test server.
pub struct Document {
    client: Client,
}

impl Document {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(base_url)?,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create a mutable document on the server. Both the id and the
    /// initial body are optional; the server generates an id when none is
    /// given.
    pub async fn create(
        &self,
        id: Option<&str>,
        dictionary: Option<BTreeMap<String, Value>>,
    ) -> Result<Handle> {
        let mut args = Args::new();
        match id {
            Some(id) => args.set_string("id", id),
            None => args.set_null("id"),
        };
        if let Some(dictionary) = dictionary {
            args.set_dict("dictionary", dictionary);
        }
        self.client.invoke("document_create", &args).await?.into_pointer()
    }

    pub async fn get_id(&self, document: &Handle) -> Result<String> {
        let mut args = Args::new();
        args.set_handle("document", document);
        self.client.invoke("document_getId", &args).await?.into_string()
    }

    /// Read a string property; `None` when the key is absent.
    pub async fn get_string(&self, document: &Handle, key: &str) -> Result<Option<String>> {
        let mut args = Args::new();
        args.set_handle("document", document).set_string("key", key);
        match self.client.invoke("document_getString", &args).await? {
            Value::Null => Ok(None),
            other => other.into_string().map(Some),
        }
    }

    pub async fn set_string(&self, document: &Handle, key: &str, value: &str) -> Result<()> {
        let mut args = Args::new();
        args.set_handle("document", document)
            .set_string("key", key)
            .set_string("value", value);
        self.client.invoke("document_setString", &args).await?;
        Ok(())
    }

    /// The document body as a keyed mapping.
    pub async fn to_map(&self, document: &Handle) -> Result<BTreeMap<String, Value>> {
        let mut args = Args::new();
        args.set_handle("document", document);
        let result = self.client.invoke("document_toMap", &args).await?;
        match result {
            Value::Dict(entries) => Ok(entries),
            other => Err(BridgeError::UnexpectedValue {
                expected: "dict",
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub async fn release(&self, handle: &Handle) -> Result<()> {
        self.client.release(handle).await
    }
}
