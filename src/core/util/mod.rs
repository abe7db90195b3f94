pub mod path_util;
