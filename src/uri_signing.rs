const URI_SIGNING_PREFIX: &str = "uri_signing_";
const URI_SIGNING_SUFFIX: &str = ".config";

/// Delivery service name of a `uri_signing_<ds>.config` file name, empty
/// when the name does not follow that pattern
pub fn ds_from_uri_signing_config_file_name(file_name: &str) -> &str {
    file_name
        .strip_prefix(URI_SIGNING_PREFIX)
        .and_then(|rest| rest.strip_suffix(URI_SIGNING_SUFFIX))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ds_from_uri_signing_config_file_name() {
        let expected = [
            ("uri_signing_foo.config", "foo"),
            ("uri_signing_.config", ""),
            ("uri_signing.config", ""),
            ("uri_signing_foo.conf", ""),
            ("uri_signing_foo.confi", ""),
            ("uri_signing_foo_bar_baz.config", "foo_bar_baz"),
            (
                "uri_signing_uri_signing_foo_bar_baz.config.config",
                "uri_signing_foo_bar_baz.config",
            ),
        ];
        for (file_name, ds) in expected {
            assert_eq!(ds_from_uri_signing_config_file_name(file_name), ds);
        }
    }
}
