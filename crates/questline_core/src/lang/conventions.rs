//! Reserved characters and well-known names of the instruction language.

/// Prefix negating a reference (`!done` = "must NOT be satisfied").
pub const NEGATION_PREFIX: char = '!';

/// Separates the package path from the bare identifier (`quest-intro.started`).
pub const ID_SEPARATOR: char = '.';

/// Separates package path segments (`quest-intro` = `quest` / `intro`).
pub const PACKAGE_SEPARATOR: char = '-';

/// Path segment meaning "one package level up".
pub const PARENT_PACKAGE: &str = "_";

/// Separates an optional argument's key from its value (`amount:5`).
pub const KEY_SEPARATOR: char = ':';

/// Separates the elements of a reference list (`a,b,c`).
pub const LIST_SEPARATOR: char = ',';

/// Characters that open and close a quoted run.
pub const QUOTES: [char; 2] = ['"', '\''];

/// A directory containing this file is a package root.
pub const PACKAGE_MARKER_FILE: &str = "package.yml";

/// Extension of instruction source files.
pub const SOURCE_EXTENSION: &str = "yml";

/// Sub-directory of a package holding conversation files.
pub const CONVERSATIONS_DIR: &str = "conversations";
