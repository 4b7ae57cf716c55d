use chrono::{DateTime, Utc};

use crate::printer::Printer;

crate::record! {
    /// Payload exchanged by the demo client and server.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Packet {
        pub integer: i32,
        pub double: f64,
        pub string: String,
        pub nesting: Option<Box<Packet>>,
        pub birthday: DateTime<Utc>,
        pub numbers: Vec<i32>,
        pub packets: Vec<Packet>,
    }
}

impl Packet {
    /// The payload the demo server sends.
    pub fn sample() -> Self {
        let nested = Packet {
            integer: 123,
            double: 1243.0,
            string: "alpha".to_owned(),
            ..Default::default()
        };
        Packet {
            integer: i32::MAX,
            double: f64::NEG_INFINITY,
            string: "abcde".to_owned(),
            nesting: Some(Box::new(nested.clone())),
            birthday: Utc::now(),
            numbers: vec![123, 213, 213],
            packets: vec![nested],
        }
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&Printer::new().print(self))
    }
}
