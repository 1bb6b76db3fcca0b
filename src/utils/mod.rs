pub mod text;

#[cfg(test)]
pub(crate) mod shared_buffer;
