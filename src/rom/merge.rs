use std::path::Path;

use log::debug;

use crate::error::{Error, Result};

/// Name of the combined application and bootloader build file.
pub const COMBINED_FILE_NAME: &str = "AfridevV2_App_Boot_MSP430.txt";

/**
 * Combine the application and bootloader TI-TXT build files so a FET
 * programmer can burn both at once. The application's `q` terminator lines are
 * dropped, everything else is kept verbatim (line endings included).
 */
pub fn merge_build_files(app: &str, boot: &str) -> String {
    let mut merged = String::with_capacity(app.len() + boot.len());
    for line in app.split_inclusive('\n') {
        if line.starts_with('q') {
            debug!("dropping application terminator line");
            continue;
        }
        merged.push_str(line);
    }
    merged.push_str(boot);
    merged
}

pub fn merge_files(app: &Path, boot: &Path, output: &Path) -> Result<()> {
    let app_text = std::fs::read_to_string(app).map_err(|e| Error::io(app, e))?;
    let boot_text = std::fs::read_to_string(boot).map_err(|e| Error::io(boot, e))?;
    let merged = merge_build_files(&app_text, &boot_text);
    std::fs::write(output, merged).map_err(|e| Error::io(output, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_only_application_terminator() {
        let app = "@9000\n31 40 00 04\n\nq\n";
        let boot = "@FC00\n55 AA\nq\n";
        assert_eq!(
            merge_build_files(app, boot),
            "@9000\n31 40 00 04\n\n@FC00\n55 AA\nq\n"
        );
    }

    #[test]
    fn keeps_crlf_and_unterminated_last_line() {
        let app = "@9000\r\n01 02\r\nq";
        let boot = "@FC00\r\n03\r\nq\r\n";
        assert_eq!(
            merge_build_files(app, boot),
            "@9000\r\n01 02\r\n@FC00\r\n03\r\nq\r\n"
        );
    }

    #[test]
    fn any_line_starting_with_q_is_dropped() {
        assert_eq!(merge_build_files("quit\n01\n", ""), "01\n");
        assert_eq!(merge_build_files(" q\n", ""), " q\n");
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let out = std::env::temp_dir().join("afd2-merge-never-written.txt");
        let result = merge_files(
            Path::new("/nonexistent/app.txt"),
            Path::new("/nonexistent/boot.txt"),
            &out,
        );
        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(!out.exists());
    }
}
