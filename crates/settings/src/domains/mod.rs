//! Built-in configuration domains.

mod about;
mod chart;
mod logo;
mod school_meta;
mod theme;

pub use about::{AboutSection, AboutSectionDomain};
pub use chart::{ChartDomain, ChartSeries, ChartStats};
pub use logo::{LogoDomain, LogoInfo};
pub use school_meta::{SchoolMeta, SchoolMetaDomain};
pub use theme::{ThemeColors, ThemeDomain, is_hex_color};
