/// Case-insensitive header presence check.
pub fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_header_ignores_case() {
        let headers = vec![("Content-Type".to_string(), "text/plain".to_string())];
        assert!(has_header(&headers, "content-type"));
        assert!(has_header(&headers, "CONTENT-TYPE"));
        assert!(!has_header(&headers, "content-length"));
    }
}
