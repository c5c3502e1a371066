//! Request authentication.

use crate::client::Client;
use crate::http::HttpRequest;

impl Client {
    /// Attach `Authorization: token <credential>` to `request`.
    ///
    /// The credential is not validated; an empty one still yields a
    /// well-formed header.
    pub fn authorize(&self, request: &mut HttpRequest) {
        request
            .headers
            .push(("Authorization".to_string(), format!("token {}", self.token)));
    }
}
