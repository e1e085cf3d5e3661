//! API numbers, open flags and server error names

/// Request a native authentication challenge
pub const AUTH_REQUEST_AN: i32 = 703;
/// Answer a native authentication challenge
pub const AUTH_RESPONSE_AN: i32 = 704;

pub const DATA_OBJ_OPEN_AN: i32 = 602;
pub const DATA_OBJ_CLOSE_AN: i32 = 673;
pub const DATA_OBJ_READ_AN: i32 = 675;
pub const DATA_OBJ_WRITE_AN: i32 = 676;

pub const O_RDONLY: i32 = 0;
pub const O_WRONLY: i32 = 1;
pub const O_CREAT: i32 = 0o100;
pub const O_TRUNC: i32 = 0o1000;

/// Open flags for write-truncate: create if missing, discard prior content
pub const WRITE_TRUNCATE_FLAGS: i32 = O_WRONLY | O_CREAT | O_TRUNC;

/// Permission bits for newly created data objects
pub const DEFAULT_CREATE_MODE: i32 = 0o644;

/// Keyword selecting the destination storage resource
pub const DEST_RESC_NAME_KW: &str = "destRescName";

const ERROR_NAMES: &[(i32, &str)] = &[
    (-4000, "SYS_HEADER_READ_LEN_ERR"),
    (-310000, "USER_FILE_DOES_NOT_EXIST"),
    (-358000, "OBJ_PATH_DOES_NOT_EXIST"),
    (-510000, "UNIX_FILE_OPEN_ERR"),
    (-808000, "CAT_NO_ROWS_FOUND"),
    (-809000, "CAT_NAME_EXISTS_AS_COLLECTION"),
    (-818000, "CAT_NO_ACCESS_PERMISSION"),
    (-826000, "CAT_INVALID_AUTHENTICATION"),
    (-827000, "CAT_INVALID_USER"),
];

/// Symbolic name of a server status code
///
/// Codes carry an errno in their last three digits (`-510002` is
/// `UNIX_FILE_OPEN_ERR` with ENOENT), so lookup uses the rounded base code.
pub fn error_name(code: i32) -> &'static str {
    let base = (code / 1000) * 1000;
    let base = if base == 0 { code } else { base };
    ERROR_NAMES
        .iter()
        .find(|(known, _)| *known == base)
        .map(|(_, name)| *name)
        .unwrap_or("UNKNOWN_ERROR")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_name_exact() {
        assert_eq!(error_name(-826000), "CAT_INVALID_AUTHENTICATION");
        assert_eq!(error_name(-808000), "CAT_NO_ROWS_FOUND");
        assert_eq!(error_name(-4000), "SYS_HEADER_READ_LEN_ERR");
    }

    #[test]
    fn test_error_name_with_errno_suffix() {
        assert_eq!(error_name(-510002), "UNIX_FILE_OPEN_ERR");
        assert_eq!(error_name(-818013), "CAT_NO_ACCESS_PERMISSION");
    }

    #[test]
    fn test_unknown_error_name() {
        assert_eq!(error_name(-999000), "UNKNOWN_ERROR");
        assert_eq!(error_name(-1), "UNKNOWN_ERROR");
    }

    #[test]
    fn test_write_flags() {
        assert_eq!(WRITE_TRUNCATE_FLAGS, 0o1101);
        assert_eq!(WRITE_TRUNCATE_FLAGS & O_TRUNC, O_TRUNC);
    }
}
