pub mod layout;
mod spline;
mod text;
pub mod widget;
pub mod widgets;

pub use layout::{Color, Rect, ScreenLayout};
pub use spline::{Spline, SplinePoint, SplineRenderer, SplineVertex};
pub use text::{TextRenderer, TextVertex};
pub use widget::{Widget, WidgetOutput};
