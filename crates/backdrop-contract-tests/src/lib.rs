// GL entry points are `unsafe fn`; unsafe blocks in this crate only ever drive the in-memory
// recording context.


mod color_contract;
mod state_contract;
