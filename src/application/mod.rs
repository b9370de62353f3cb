pub mod live_engine;
