//! Request specifications
//!
//! A `RequestSpec` knows how to turn a shared client into a fully configured
//! request (method, headers, body) and what identity the response is cached
//! under. The fetcher treats it as opaque.

use crate::url::form_identity;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER};
use reqwest::{Client, RequestBuilder};

/// Builds the request for one resource
pub trait RequestSpec: Send + Sync {
    /// Identity the response is cached under
    fn identity(&self) -> String;

    /// Builds the request on the given client
    fn build(&self, client: &Client) -> RequestBuilder;
}

/// Plain GET of a page
#[derive(Debug, Clone)]
pub struct GetPage {
    url: String,
}

impl GetPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RequestSpec for GetPage {
    fn identity(&self) -> String {
        self.url.clone()
    }

    fn build(&self, client: &Client) -> RequestBuilder {
        client.get(&self.url)
    }
}

/// Form-encoded POST issued the way the site's own scripts query it
#[derive(Debug, Clone)]
pub struct FormQuery {
    url: String,
    body: String,
    referer: Option<String>,
}

impl FormQuery {
    /// Creates a query posting `fields` to `url`
    ///
    /// # Example
    ///
    /// ```
    /// use excavator::net::{FormQuery, RequestSpec};
    ///
    /// let query = FormQuery::new("http://site/bushou/zi/", &[("wd", "乙")]);
    /// assert_eq!(query.body(), "wd=%E4%B9%99");
    /// assert_eq!(query.identity(), "http://site/bushou/zi/?wd=%E4%B9%99");
    /// ```
    pub fn new(url: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        Self {
            url: url.into(),
            body,
            referer: None,
        }
    }

    /// Sets the page the query claims to come from
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The encoded form body
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl RequestSpec for FormQuery {
    fn identity(&self) -> String {
        form_identity(&self.url, &self.body)
    }

    fn build(&self, client: &Client) -> RequestBuilder {
        let mut request = client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .body(self.body.clone());

        if let Some(referer) = &self.referer {
            request = request.header(REFERER, referer.as_str());
        }

        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_page_identity_is_url() {
        let page = GetPage::new("http://site/x");
        assert_eq!(page.identity(), "http://site/x");
    }

    #[test]
    fn test_get_page_builds_get() {
        let client = Client::new();
        let request = GetPage::new("http://site/x").build(&client).build().unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().as_str(), "http://site/x");
    }

    #[test]
    fn test_form_query_builds_post() {
        let client = Client::new();
        let query = FormQuery::new("http://site/q", &[("wd", "a b")]).with_referer("http://site/");
        let request = query.build(&client).build().unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.headers().get(REFERER).unwrap(), "http://site/");
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()).unwrap(),
            b"wd=a+b"
        );
    }

    #[test]
    fn test_form_query_identity_includes_body() {
        let a = FormQuery::new("http://site/q", &[("wd", "a")]);
        let b = FormQuery::new("http://site/q", &[("wd", "b")]);
        assert_ne!(a.identity(), b.identity());
    }
}
