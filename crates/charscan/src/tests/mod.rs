mod cursor;
mod literals;
