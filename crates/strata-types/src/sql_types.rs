//! JDBC `java.sql.Types` codes carried in column metadata.
//!
//! The server reports these alongside the semantic base type. The
//! decoder never dispatches on them; they exist so descriptors built in
//! code match the ones loaded from metadata.

pub const CHAR: i32 = 1;
pub const NUMERIC: i32 = 2;
pub const DECIMAL: i32 = 3;
pub const INTEGER: i32 = 4;
pub const SMALLINT: i32 = 5;
pub const REAL: i32 = 7;
pub const DOUBLE: i32 = 8;
pub const VARCHAR: i32 = 12;
pub const BOOLEAN: i32 = 16;
pub const DATE: i32 = 91;
pub const TIME: i32 = 92;
pub const TIMESTAMP: i32 = 93;
pub const TIMESTAMP_WITH_TIMEZONE: i32 = 2014;
pub const TINYINT: i32 = -6;
pub const BIGINT: i32 = -5;
pub const BINARY: i32 = -2;
pub const OTHER: i32 = 1111;
pub const JAVA_OBJECT: i32 = 2000;
pub const STRUCT: i32 = 2002;
pub const ARRAY: i32 = 2003;
