// Vigil Infrastructure - In-Process Transport
// Implements: QueueClient

pub mod client;

pub use client::MemoryQueueClient;
