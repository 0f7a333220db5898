//! Configuration section definitions.
//!
//! Each module corresponds to a section in `volum.toml`:
//!
//! | Module  | TOML Section | Purpose                              |
//! |---------|--------------|--------------------------------------|
//! | `scene` | `[scene]`    | Scene file, generator, interpreter   |
//! | `serve` | `[serve]`    | Read endpoint and viewer channels    |
//! | `watch` | `[watch]`    | Debounce and reload retry            |

mod scene;
mod serve;
mod watch;

pub use scene::SceneConfig;
pub use serve::ServeConfig;
pub use watch::WatchConfig;
