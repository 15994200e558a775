mod valid_body;

pub use valid_body::ValidBody;
