//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pressroom.toml`:
//!
//! | Module      | TOML Section   | Purpose                                |
//! |-------------|----------------|----------------------------------------|
//! | `build`     | `[build]`      | Draft/future flags, scratch location   |
//! | `content`   | `[content]`    | Defaults for new posts                 |
//! | `generator` | `[generator]`  | Hugo binary location and installation  |
//! | `serve`     | `[serve]`      | Preview server                         |
//! | `theme`     | `[theme]`      | Theme override and archive host        |

mod build;
mod content;
mod generator;
mod serve;
mod theme;

pub use build::BuildConfig;
pub use content::ContentConfig;
pub use generator::GeneratorConfig;
pub use serve::ServeConfig;
pub use theme::ThemeConfig;
