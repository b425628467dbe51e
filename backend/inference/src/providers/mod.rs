pub mod groq;
pub mod mock;
