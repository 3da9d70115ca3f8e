//! `application/x-www-form-urlencoded` bodies.

use std::borrow::Cow;

/// Decoded form fields, in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    /// Decode a form body.
    ///
    /// Surrounding whitespace (including a trailing CRLF some clients send)
    /// is ignored. Each `&`-separated pair is split on its first `=`; a
    /// pair without `=` yields an empty value. Invalid percent escapes are
    /// kept verbatim.
    pub fn parse(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let fields = text
            .trim()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(name), decode(value))
            })
            .collect();

        Self { fields }
    }

    /// First value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value for `name`, or `""` when absent.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| spaced.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_form() {
        let form = Form::parse(b"user=ana%40example.com&pass=Secret1&accion=login");

        assert_eq!(form.get("user"), Some("ana@example.com"));
        assert_eq!(form.get("pass"), Some("Secret1"));
        assert_eq!(form.get("accion"), Some("login"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_trailing_crlf_is_ignored() {
        let form = Form::parse(b"numero=42\r\n");
        assert_eq!(form.get("numero"), Some("42"));
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let form = Form::parse(b"name=Ana+Maria&sum=1%2B1");
        assert_eq!(form.get("name"), Some("Ana Maria"));
        assert_eq!(form.get("sum"), Some("1+1"));
    }

    #[test]
    fn test_value_splits_on_first_equals() {
        let form = Form::parse(b"token=a=b=c");
        assert_eq!(form.get("token"), Some("a=b=c"));
    }

    #[test]
    fn test_pair_without_value() {
        let form = Form::parse(b"flag&other=1");
        assert_eq!(form.get("flag"), Some(""));
        assert_eq!(form.value("absent"), "");
    }

    #[test]
    fn test_empty_body() {
        assert!(Form::parse(b"").is_empty());
        assert!(Form::parse(b"\r\n").is_empty());
    }

    #[test]
    fn test_invalid_escape_is_kept() {
        let form = Form::parse(b"x=%zz");
        assert_eq!(form.get("x"), Some("%zz"));
    }
}
