use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn write_string_to_file(filename: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(filename)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Replaces every non-alphanumeric character with `_`, the rule used for
/// exported diagram filenames.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_alphanumerics() {
        assert_eq!(sanitize_filename("Line 3: wash/rinse"), "Line_3__wash_rinse");
        assert_eq!(sanitize_filename("plain"), "plain");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = std::env::temp_dir().join("procflow-common-test");
        let path = dir.join("nested").join("out.txt");
        write_string_to_file(&path, "ok").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ok");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
