use super::MemoryRecord;

/// BLAKE3 digest over every field of every record, in order. Identifies
/// which data an index was built from in logs and status output.
pub fn fingerprint(records: &[MemoryRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    for record in records {
        hasher.update(record.location.as_bytes());
        hasher.update(&[0]);
        hasher.update(&record.coordinates.latitude.to_le_bytes());
        hasher.update(&record.coordinates.longitude.to_le_bytes());
        hasher.update(record.caption.as_bytes());
        hasher.update(&[0]);
        hasher.update(record.image.as_bytes());
        hasher.update(&[0xff]);
    }
    hasher.finalize().to_hex().to_string()
}
