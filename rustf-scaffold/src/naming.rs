//! Name derivations shared by the emitters and the pipeline

use crate::config::PrefixStrip;

/// Split on `_`, upper-case the first character of every segment and join
/// without separator: `yii_user_log` -> `YiiUserLog`.
pub fn to_camel_case(input: &str) -> String {
    input
        .split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// `blog_post` -> `blog-post`
pub fn to_kebab_case(input: &str) -> String {
    input.replace('_', "-")
}

/// Remove the configured table prefix from a table name
pub fn strip_table_prefix(table: &str, prefix: &str, mode: PrefixStrip) -> String {
    if prefix.is_empty() {
        return table.to_string();
    }

    match mode {
        PrefixStrip::Literal => table.strip_prefix(prefix).unwrap_or(table).to_string(),
        PrefixStrip::Charset => table
            .trim_matches(|c: char| prefix.contains(c))
            .to_string(),
    }
}

/// Append `.{extension}` unless the name already ends with it
pub fn with_extension(name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    if name.to_lowercase().ends_with(&suffix.to_lowercase()) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Non-empty and made of ASCII letters, digits and `_` only.
///
/// Table base names become directory and file names, so nothing else is accepted.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Usable as a Rust type name: a plain name starting with a letter
pub fn is_type_name(name: &str) -> bool {
    is_plain_name(name) && name.starts_with(|c: char| c.is_ascii_alphabetic())
}
