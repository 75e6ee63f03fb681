pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/fleetmon.v1.rs"));
}

pub mod retry;
