//! snake_case to lowerCamelCase conversion for behavior names and option keys

/// Convert `s` to lowerCamelCase.
///
/// Separators (`_`, `-`, `.`, space) are dropped and capitalize the next
/// letter, as does a digit. Other non-alphanumeric characters are dropped.
/// An upper case letter directly after another one is lowered, so runs of
/// capitals collapse (`HTTP_ENABLED` becomes `httpEnabled`).
pub fn to_lower_camel(s: &str) -> String {
    let s = s.trim();
    let mut out = String::with_capacity(s.len());
    let mut cap_next = false;
    let mut prev_upper = false;

    for (i, c) in s.chars().enumerate() {
        let upper = c.is_ascii_uppercase();
        if c.is_ascii_alphabetic() {
            let c = if cap_next {
                c.to_ascii_uppercase()
            } else if i == 0 || (prev_upper && upper) {
                c.to_ascii_lowercase()
            } else {
                c
            };
            out.push(c);
            cap_next = false;
        } else if c.is_ascii_digit() {
            out.push(c);
            cap_next = true;
        } else {
            cap_next = matches!(c, '_' | ' ' | '-' | '.');
        }
        prev_upper = upper;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_to_lower_camel() {
        assert_eq!(to_lower_camel("cp_code"), "cpCode");
        assert_eq!(to_lower_camel("m_pulse"), "mPulse");
        assert_eq!(to_lower_camel("origin"), "origin");
        assert_eq!(to_lower_camel("gzip_response"), "gzipResponse");
    }

    #[test]
    fn test_digits_capitalize_next_letter() {
        assert_eq!(to_lower_camel("ipv6_origin"), "ipv6Origin");
        assert_eq!(to_lower_camel("http2"), "http2");
        assert_eq!(to_lower_camel("enable_es256"), "enableEs256");
        assert_eq!(to_lower_camel("sha1hash"), "sha1Hash");
    }

    #[test]
    fn test_existing_camel_is_kept() {
        assert_eq!(to_lower_camel("someOption"), "someOption");
        assert_eq!(to_lower_camel("SomeOption"), "someOption");
        assert_eq!(to_lower_camel(" trailing_space "), "trailingSpace");
        assert_eq!(to_lower_camel(""), "");
    }

    #[test]
    fn test_capital_runs_are_lowered() {
        assert_eq!(to_lower_camel("ID"), "id");
        assert_eq!(to_lower_camel("HTTP_ENABLED"), "httpEnabled");
        assert_eq!(to_lower_camel("someHTTPOption"), "someHttpoption");
        assert_eq!(to_lower_camel("cache_ID"), "cacheId");
    }
}
