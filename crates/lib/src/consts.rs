/// Application name, used for data directories and generated file prefixes.
pub const APP_NAME: &str = "vispkg";

/// Length of the truncated SHA-256 used as a package id.
pub const PACKAGE_ID_LEN: usize = 20;

/// Default recipe file name looked up in a package directory.
pub const RECIPE_FILENAME: &str = "recipe.lua";

/// File that marks a directory as a buildable CMake project.
pub const BUILD_DESCRIPTION_FILENAME: &str = "CMakeLists.txt";

/// File CMake writes into every configured build tree.
pub const CMAKE_CACHE_FILENAME: &str = "CMakeCache.txt";

/// Marker written into a package folder once it is fully staged and verified.
pub const PACKAGE_COMPLETE_MARKER: &str = ".vispkg-complete";

/// Per-context lock file guarding a settings-scoped working directory.
pub const LOCK_FILENAME: &str = ".lock";

/// Build target that builds and stages artifacts for packaging.
pub const INSTALL_TARGET: &str = "install";

/// January 1, 1980 00:00:00 UTC (ZIP epoch), exported for reproducible timestamps.
pub const SOURCE_DATE_EPOCH: &str = "315532800";
