use serde::Deserialize;

use crate::{
    paths,
    requester::{EndpointRequester, NoParams, Transport},
    types::JsonSuccess,
    Error, UserPass,
};

#[derive(Deserialize)]
struct UserList {
    users: Vec<String>,
}

pub struct KeystoreApi<'a> {
    requester: EndpointRequester<'a>,
}

impl<'a> KeystoreApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self {
            requester: EndpointRequester::new(transport, paths::KEYSTORE, "keystore"),
        }
    }

    pub async fn create_user(&self, user: &UserPass) -> Result<bool, Error> {
        let reply: JsonSuccess = self.requester.send_request("createUser", user).await?;
        Ok(reply.success)
    }

    pub async fn list_users(&self) -> Result<Vec<String>, Error> {
        let reply: UserList = self
            .requester
            .send_request("listUsers", &NoParams {})
            .await?;
        Ok(reply.users)
    }

    pub async fn delete_user(&self, user: &UserPass) -> Result<bool, Error> {
        let reply: JsonSuccess = self.requester.send_request("deleteUser", user).await?;
        Ok(reply.success)
    }
}
