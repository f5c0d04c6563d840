// tripmate/tripmate-utils
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

mod id_string_macro;

pub use id_string_macro::*;
