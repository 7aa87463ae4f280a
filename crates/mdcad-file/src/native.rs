//! MDCAD 原生文件格式（.mdcad）
//!
//! 基于 MessagePack + Zstd 的紧凑二进制格式：
//! - 体积小：MessagePack 比 JSON 小 30-50%，Zstd 再压缩 60-80%
//! - 速度快：直接序列化/反序列化，无文本解析
//! - 简单可靠：定长文件头 + 单个压缩负载

use crate::document::DesignBundle;
use crate::error::FileError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// 文件魔数 "MDCD"
const MAGIC: &[u8; 4] = b"MDCD";

/// 当前文件格式版本
const FORMAT_VERSION: u32 = 1;

/// Zstd 压缩级别（1-22，3 是默认值，平衡速度和压缩比）
const COMPRESSION_LEVEL: i32 = 3;

/// 文件头（16 字节）
#[derive(Debug)]
struct FileHeader {
    magic: [u8; 4],
    version: u32,
    /// 标志位（预留）
    flags: u32,
    /// 压缩后数据长度
    compressed_size: u32,
}

impl FileHeader {
    fn new(compressed_size: u32) -> Self {
        Self {
            magic: *MAGIC,
            version: FORMAT_VERSION,
            flags: 0,
            compressed_size,
        }
    }

    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        Ok(())
    }

    fn read(reader: &mut impl Read) -> Result<Self, FileError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;

        if &magic != MAGIC {
            return Err(FileError::InvalidFormat(
                "Invalid magic number, not an MDCAD file".to_string(),
            ));
        }

        let mut buf = [0u8; 4];

        reader.read_exact(&mut buf)?;
        let version = u32::from_le_bytes(buf);

        reader.read_exact(&mut buf)?;
        let flags = u32::from_le_bytes(buf);

        reader.read_exact(&mut buf)?;
        let compressed_size = u32::from_le_bytes(buf);

        Ok(Self {
            magic,
            version,
            flags,
            compressed_size,
        })
    }
}

/// 保存设计束到文件
pub fn save(bundle: &DesignBundle, path: &Path) -> Result<(), FileError> {
    // 序列化为 MessagePack
    let msgpack_data = rmp_serde::to_vec(bundle)?;

    // 使用 Zstd 压缩
    let compressed_data = zstd::encode_all(msgpack_data.as_slice(), COMPRESSION_LEVEL)?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let header = FileHeader::new(compressed_data.len() as u32);
    header.write(&mut writer)?;
    writer.write_all(&compressed_data)?;
    writer.flush()?;

    tracing::info!(
        "Saved {} entities, {} macro blocks to {} ({} bytes compressed)",
        bundle.elements.len(),
        bundle.macro_library.blocks().len(),
        path.display(),
        compressed_data.len()
    );

    Ok(())
}

/// 从文件加载设计束
pub fn load(path: &Path) -> Result<DesignBundle, FileError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let header = FileHeader::read(&mut reader)?;

    if header.version > FORMAT_VERSION {
        return Err(FileError::UnsupportedVersion(format!(
            "File version {} is newer than supported version {}",
            header.version, FORMAT_VERSION
        )));
    }

    let mut compressed_data = vec![0u8; header.compressed_size as usize];
    reader.read_exact(&mut compressed_data)?;

    let msgpack_data = zstd::decode_all(compressed_data.as_slice())?;
    let bundle: DesignBundle = rmp_serde::from_slice(&msgpack_data)?;

    tracing::info!(
        "Loaded {} entities from {}",
        bundle.elements.len(),
        path.display()
    );

    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdcad_core::entity::Entity;
    use mdcad_core::math::Point2;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file_path = dir.path().join("test_design.mdcad");

        let mut bundle = DesignBundle::new(vec![
            Entity::new_rect("M1", Point2::new(100.0, 100.0), 40.0, 20.0),
            Entity::new_line("M2", Point2::new(0.0, 0.0), Point2::new(50.0, 50.0), 2.0),
        ]);
        bundle.metadata.title = "Test Design".to_string();

        save(&bundle, &file_path).expect("Failed to save");

        // 验证文件头
        let file = File::open(&file_path).expect("Failed to open");
        let mut reader = BufReader::new(file);
        let header = FileHeader::read(&mut reader).expect("Failed to read header");
        assert_eq!(&header.magic, MAGIC);
        assert_eq!(header.version, FORMAT_VERSION);

        let loaded = load(&file_path).expect("Failed to load");
        assert_eq!(loaded.metadata.title, "Test Design");
        assert_eq!(loaded.elements, bundle.elements);
    }

    #[test]
    fn test_invalid_magic() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file_path = dir.path().join("test_invalid.mdcad");

        let mut file = File::create(&file_path).expect("Failed to create");
        file.write_all(b"XXXX").expect("Failed to write");
        file.write_all(&[0u8; 12]).expect("Failed to write padding");

        let result = load(&file_path);
        assert!(matches!(result, Err(FileError::InvalidFormat(_))));
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file_path = dir.path().join("test_future.mdcad");

        let mut file = File::create(&file_path).expect("Failed to create");
        let header = FileHeader {
            magic: *MAGIC,
            version: FORMAT_VERSION + 1,
            flags: 0,
            compressed_size: 0,
        };
        header.write(&mut file).expect("Failed to write header");

        assert!(matches!(
            load(&file_path),
            Err(FileError::UnsupportedVersion(_))
        ));
    }
}
