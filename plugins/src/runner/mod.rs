//! Child-process tasks: spawn a tool, pump its output into the parser, judge the exit.

mod io_pump;
mod ring;
mod tool;

pub use io_pump::{pump, LineStream, LineTap};
pub use ring::RingBytes;
pub use tool::{ToolSpec, ToolTask};
