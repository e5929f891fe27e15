use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use log::debug;

use crate::error::FormatError;
use crate::snapshot::Snapshot;

/// Distance from the signature lead byte to the revision marker
pub const REVISION_MARKER_OFFSET: usize = 12;

/// Distance from the signature lead byte to the first header field
pub const HEADER_OFFSET: usize = 13;

/// Revision 0 keeps its system messages at fixed addresses instead of
/// publishing a pointer to them
pub const SYSTEM_MESSAGE_ADDRESSES: [usize; 25] = [
    27132, 27152, 27175, 27209, 27238, 27260, 27317, 27349, 27368, 27390, 27397, 27451, 27492,
    27525, 27551, 27568, 27573, 27584, 27590, 27613, 27645, 27666, 27681, 27707, 27726,
];

/// The three known database layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaRevision {
    V0,
    V5,
    V7,
}

impl SchemaRevision {
    /// Revision named by a marker byte; unknown markers mean the plain layout
    pub fn from_marker(marker: u8) -> SchemaRevision {
        match marker {
            5 => SchemaRevision::V5,
            7 => SchemaRevision::V7,
            _ => SchemaRevision::V0,
        }
    }

    /// Strict parse used for command-line and configuration overrides
    pub fn from_number(n: u8) -> Option<SchemaRevision> {
        match n {
            0 => Some(SchemaRevision::V0),
            5 => Some(SchemaRevision::V5),
            7 => Some(SchemaRevision::V7),
            _ => None,
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            SchemaRevision::V0 => 0,
            SchemaRevision::V5 => 5,
            SchemaRevision::V7 => 7,
        }
    }

    /// Revisions 5 and 7 carry the system message table and object map
    pub fn is_extended(self) -> bool {
        self != SchemaRevision::V0
    }
}

/// Header fields resolved from the signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub signature: usize,
    pub revision: SchemaRevision,
    pub capacity: u8,
    pub object_count: u8,
    pub location_count: u8,
    pub message_count: u8,
    pub system_message_count: u8,
    pub responses: usize,
    pub process: usize,
    pub objects: usize,
    pub locations: usize,
    pub messages: usize,
    pub system_messages: Option<usize>,
    pub connections: usize,
    pub vocabulary: usize,
    pub object_positions: usize,
    pub object_map: Option<usize>,
}

impl Header {
    /// Find the signature and read the header behind it. `forced` overrides
    /// the revision marker stored in the image.
    pub fn locate(snap: &Snapshot, forced: Option<SchemaRevision>) -> Result<Header, FormatError> {
        let signature = snap.find_signature()?;
        let revision = match forced {
            Some(revision) => revision,
            None => SchemaRevision::from_marker(
                snap.byte(signature + REVISION_MARKER_OFFSET, "revision marker")?,
            ),
        };
        debug!("Schema revision {:?}", revision);

        let base = signature + HEADER_OFFSET;
        let capacity = snap.byte(base, "header")?;
        let object_count = snap.byte(base + 1, "header")?;
        let location_count = snap.byte(base + 2, "header")?;
        let message_count = snap.byte(base + 3, "header")?;

        let header = if revision.is_extended() {
            // One extra count shifts every pointer by a byte
            let p = base + 1;
            Header {
                signature,
                revision,
                capacity,
                object_count,
                location_count,
                message_count,
                system_message_count: snap.byte(p + 3, "header")?,
                responses: snap.pointer(p + 4, "response table")?,
                process: snap.pointer(p + 6, "process table")?,
                objects: snap.pointer(p + 8, "object table")?,
                locations: snap.pointer(p + 10, "location table")?,
                messages: snap.pointer(p + 12, "message table")?,
                system_messages: Some(snap.pointer(p + 14, "system message table")?),
                connections: snap.pointer(p + 16, "connection table")?,
                vocabulary: snap.pointer(p + 18, "vocabulary")?,
                object_positions: snap.pointer(p + 20, "object positions")?,
                object_map: Some(snap.pointer(p + 22, "object map")?),
            }
        } else {
            let p = base;
            Header {
                signature,
                revision,
                capacity,
                object_count,
                location_count,
                message_count,
                system_message_count: SYSTEM_MESSAGE_ADDRESSES.len() as u8,
                responses: snap.pointer(p + 4, "response table")?,
                process: snap.pointer(p + 6, "process table")?,
                objects: snap.pointer(p + 8, "object table")?,
                locations: snap.pointer(p + 10, "location table")?,
                messages: snap.pointer(p + 12, "message table")?,
                system_messages: None,
                connections: snap.pointer(p + 14, "connection table")?,
                vocabulary: snap.pointer(p + 16, "vocabulary")?,
                object_positions: snap.pointer(p + 18, "object positions")?,
                object_map: None,
            }
        };
        debug!("{}", header);
        Ok(header)
    }
}

fn optional(addr: Option<usize>) -> String {
    match addr {
        Some(a) => format!("{:#06x}", a),
        None => "-".to_string(),
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "
Schema revision:          {}
Signature address:        {:#06x}
Carry capacity:           {}
Objects:                  {}
Locations:                {}
Messages:                 {}
System messages:          {}
Response table:           {:#06x}
Process table:            {:#06x}
Object text table:        {:#06x}
Location text table:      {:#06x}
Message text table:       {:#06x}
System message table:     {}
Connection table:         {:#06x}
Vocabulary:               {:#06x}
Object positions:         {:#06x}
Object word map:          {}
",
            self.revision.marker(),
            self.signature,
            self.capacity,
            self.object_count,
            self.location_count,
            self.message_count,
            self.system_message_count,
            self.responses,
            self.process,
            self.objects,
            self.locations,
            self.messages,
            optional(self.system_messages),
            self.connections,
            self.vocabulary,
            self.object_positions,
            optional(self.object_map),
        )
    }
}
