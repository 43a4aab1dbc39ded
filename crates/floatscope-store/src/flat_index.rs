//! Exact nearest-neighbour index stored in the FAISS `IndexFlatL2` layout.
//!
//! On disk (little-endian):
//!   fourcc "IxF2"
//!   d: i32, ntotal: i64, 2 × i64 placeholder (1 << 20), is_trained: u8, metric: i32
//!   count: u64, then `count` f32 values (count == ntotal * d)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, StoreError};

const FOURCC_FLAT_L2: &[u8; 4] = b"IxF2";
const METRIC_L2: i32 = 1;
const HEADER_PLACEHOLDER: i64 = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dim: usize,
    /// Row-major, `len() * dim` values.
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, vectors: Vec::new() }
    }

    /// Build from embedding rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dim = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| StoreError::Empty("no embeddings".to_string()))?;
        let mut index = Self::new(dim);
        for row in rows {
            index.add(row)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.dim {
            return Err(StoreError::InvalidEmbeddingDimension { expected: self.dim, actual: row.len() });
        }
        self.vectors.extend_from_slice(row);
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.vectors.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` rows closest to `query` as `(position, squared L2 distance)`,
    /// nearest first. Equal distances keep row order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(StoreError::InvalidEmbeddingDimension { expected: self.dim, actual: query.len() });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, row)| (i, squared_l2(row, query)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|source| StoreError::File { path: path.to_path_buf(), source })?;
        let index = Self::read_from(&mut BufReader::new(file))?;
        tracing::debug!(path = %path.display(), rows = index.len(), dim = index.dim, "Loaded flat index");
        Ok(index)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|source| StoreError::File { path: path.to_path_buf(), source })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fourcc = [0u8; 4];
        reader.read_exact(&mut fourcc)?;
        if &fourcc != FOURCC_FLAT_L2 {
            return Err(StoreError::UnsupportedIndex(String::from_utf8_lossy(&fourcc).into_owned()));
        }

        let d = read_i32(reader)?;
        let ntotal = read_i64(reader)?;
        let _ = read_i64(reader)?;
        let _ = read_i64(reader)?;
        let _is_trained = read_u8(reader)?;
        let metric = read_i32(reader)?;

        if d <= 0 || ntotal < 0 {
            return Err(StoreError::CorruptIndex(format!("bad header: d={d}, ntotal={ntotal}")));
        }
        if metric != METRIC_L2 {
            return Err(StoreError::UnsupportedIndex(format!("IxF2 with metric {metric}")));
        }

        let dim = d as usize;
        let expected = (ntotal as u64)
            .checked_mul(dim as u64)
            .ok_or_else(|| StoreError::CorruptIndex("ntotal * d overflows".to_string()))?;
        let count = read_u64(reader)?;
        if count != expected {
            return Err(StoreError::CorruptIndex(format!(
                "payload holds {count} values, header implies {expected}"
            )));
        }

        let byte_len = usize::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| StoreError::CorruptIndex("payload too large".to_string()))?;
        // Grows with what is actually read; the header alone is not trusted for sizing.
        let mut bytes = Vec::new();
        reader.take(byte_len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != byte_len {
            return Err(StoreError::CorruptIndex(format!(
                "truncated payload: {} of {byte_len} bytes",
                bytes.len()
            )));
        }

        let vectors = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Self { dim, vectors })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let d = i32::try_from(self.dim)
            .map_err(|_| StoreError::CorruptIndex(format!("dimension {} too large", self.dim)))?;
        writer.write_all(FOURCC_FLAT_L2)?;
        writer.write_all(&d.to_le_bytes())?;
        writer.write_all(&(self.len() as i64).to_le_bytes())?;
        writer.write_all(&HEADER_PLACEHOLDER.to_le_bytes())?;
        writer.write_all(&HEADER_PLACEHOLDER.to_le_bytes())?;
        writer.write_all(&[1u8])?;
        writer.write_all(&METRIC_L2.to_le_bytes())?;
        writer.write_all(&(self.vectors.len() as u64).to_le_bytes())?;
        for v in &self.vectors {
            writer.write_all(&v.to_le_bytes())?;
        }
        Ok(())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_i64<R: Read>(r: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn index() -> FlatIndex {
        FlatIndex::from_rows(&[
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
            vec![1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_squared_distance() {
        let hits = index().search(&[0.9, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.0).collect();
        // rows 1 and 3 tie; row order breaks the tie
        assert_eq!(positions, vec![1, 3, 0]);
        assert!((hits[0].1 - 0.01).abs() < 1e-6);
        assert!((hits[2].1 - 0.81).abs() < 1e-6);
    }

    #[test]
    fn test_search_k_larger_than_rows() {
        let hits = index().search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 4);
        assert!(index().search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_dimension() {
        let err = index().search(&[0.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEmbeddingDimension { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_header_layout_matches_faiss() {
        let mut buf = Vec::new();
        index().write_to(&mut buf).unwrap();
        // 4 + 4 + 8*3 + 1 + 4 + 8 header bytes, then 8 floats
        assert_eq!(buf.len(), 45 + 8 * 4);
        assert_eq!(&buf[..4], b"IxF2");
        assert_eq!(i32::from_le_bytes(buf[4..8].try_into().unwrap()), 2);
        assert_eq!(i64::from_le_bytes(buf[8..16].try_into().unwrap()), 4);
        assert_eq!(i32::from_le_bytes(buf[33..37].try_into().unwrap()), 1);
        assert_eq!(u64::from_le_bytes(buf[37..45].try_into().unwrap()), 8);

        let back = FlatIndex::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back, index());
    }

    #[test]
    fn test_rejects_other_index_types() {
        let mut buf = Vec::new();
        index().write_to(&mut buf).unwrap();
        buf[..4].copy_from_slice(b"IxFI");
        let err = FlatIndex::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedIndex(ref t) if t == "IxFI"));
    }

    #[test]
    fn test_oversized_header_is_corrupt_not_allocated() {
        let ntotal: i64 = 1 << 40;
        let mut buf = Vec::new();
        buf.extend_from_slice(b"IxF2");
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&ntotal.to_le_bytes());
        buf.extend_from_slice(&HEADER_PLACEHOLDER.to_le_bytes());
        buf.extend_from_slice(&HEADER_PLACEHOLDER.to_le_bytes());
        buf.push(1);
        buf.extend_from_slice(&METRIC_L2.to_le_bytes());
        buf.extend_from_slice(&(ntotal as u64).to_le_bytes());
        buf.extend_from_slice(&[0u8; 8]);

        let err = FlatIndex::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, StoreError::CorruptIndex(ref m) if m.starts_with("truncated payload: 8 of")));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let mut buf = Vec::new();
        index().write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 3);
        let err = FlatIndex::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, StoreError::CorruptIndex(_)));
    }
}
