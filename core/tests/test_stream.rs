// Chunked compressed streams:
//
// * writer/reader round-trips with random read sizes and byte-at-a-time I/O
// * end-of-stream, skip, available
// * malformed streams (truncation, oversized or empty frames)
// * close semantics

#[cfg(test)]
mod tests {
    use std::io::{ErrorKind, Read, Write};

    use qat_core::codec::{Algorithm, DataFormat};
    use qat_core::session::{Session, SessionConfig};
    use qat_core::stream::framing::{decode_frame, encode_frame};
    use qat_core::stream::{CompressorWriter, DecompressorReader};
    use rand::{Rng, RngCore};

    fn random_bytes(n: usize) -> Vec<u8> {
        let mut v = vec![0u8; n];
        rand::thread_rng().fill_bytes(&mut v);
        v
    }

    fn text_bytes(n: usize) -> Vec<u8> {
        b"lorem ipsum dolor sit amet, consectetur adipiscing elit; "
            .iter()
            .copied()
            .cycle()
            .take(n)
            .collect()
    }

    fn compress_stream(data: &[u8], buffer_size: usize, config: SessionConfig) -> Vec<u8> {
        let mut writer = CompressorWriter::with_buffer_size(Vec::new(), buffer_size, config).unwrap();
        writer.write_all(data).unwrap();
        writer.into_inner().unwrap()
    }

    fn frame_count(mut wire: &[u8]) -> usize {
        let mut frames = 0;
        while !wire.is_empty() {
            let (_, rest) = decode_frame(wire).unwrap();
            wire = rest;
            frames += 1;
        }
        frames
    }

// # ✅ 1. Round-trips

    #[test]
    fn one_mib_random_with_random_reads() {
        let data = random_bytes(1024 * 1024);
        let config = SessionConfig::new(Algorithm::Deflate);
        let wire = compress_stream(&data, 16 * 1024, config);
        assert_eq!(frame_count(&wire), 64);

        let mut reader = DecompressorReader::with_buffer_size(&wire[..], 16 * 1024, config).unwrap();
        let mut rng = rand::thread_rng();
        let mut restored = Vec::with_capacity(data.len());
        loop {
            let mut chunk = vec![0u8; rng.gen_range(1..=20 * 1024)];
            let n = reader.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            restored.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(restored, data);

        // end of stream is sticky
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read_byte().unwrap(), None);
        reader.close().unwrap();
    }

    #[test]
    fn every_algorithm_streams() {
        for alg in [Algorithm::Deflate, Algorithm::Lz4, Algorithm::Zstd] {
            let data = text_bytes(300_000);
            let config = SessionConfig::new(alg);
            let wire = compress_stream(&data, 32 * 1024, config);
            assert!(wire.len() < data.len());

            let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
            let mut restored = Vec::new();
            reader.read_to_end(&mut restored).unwrap();
            assert_eq!(restored, data);
        }
    }

    #[test]
    fn every_deflate_format_streams() {
        for format in [
            DataFormat::DeflateRaw,
            DataFormat::Deflate4B,
            DataFormat::DeflateGzip,
            DataFormat::DeflateGzipExt,
        ] {
            let config = SessionConfig { data_format: format, ..SessionConfig::default() };
            let data = text_bytes(50_000);
            let wire = compress_stream(&data, 8 * 1024, config);

            let mut reader = DecompressorReader::with_buffer_size(&wire[..], 8 * 1024, config).unwrap();
            let mut restored = Vec::new();
            reader.read_to_end(&mut restored).unwrap();
            assert_eq!(restored, data);
        }
    }

    #[test]
    fn byte_at_a_time() {
        let data = text_bytes(5000);
        let config = SessionConfig::default();

        let mut writer = CompressorWriter::with_buffer_size(Vec::new(), 1024, config).unwrap();
        for b in &data {
            writer.write_all(&[*b]).unwrap();
        }
        let wire = writer.into_inner().unwrap();
        assert_eq!(frame_count(&wire), 5);

        let mut reader = DecompressorReader::with_buffer_size(&wire[..], 1024, config).unwrap();
        let mut restored = Vec::new();
        while let Some(b) = reader.read_byte().unwrap() {
            restored.push(b);
        }
        assert_eq!(restored, data);
    }

    #[test]
    fn small_reader_buffer_grows() {
        let data = text_bytes(200_000);
        let config = SessionConfig::new(Algorithm::Zstd);
        let wire = compress_stream(&data, 128 * 1024, config);

        let mut reader = DecompressorReader::with_buffer_size(&wire[..], 512, config).unwrap();
        let mut restored = Vec::new();
        reader.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn empty_stream() {
        let config = SessionConfig::default();
        let wire = compress_stream(&[], 1024, config);
        assert!(wire.is_empty());

        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        let mut restored = Vec::new();
        assert_eq!(reader.read_to_end(&mut restored).unwrap(), 0);
        assert_eq!(reader.available().unwrap(), 0);
    }

    #[test]
    fn flush_emits_partial_frame() {
        let config = SessionConfig::default();
        let mut writer = CompressorWriter::with_buffer_size(Vec::new(), 4096, config).unwrap();
        writer.write_all(b"first").unwrap();
        writer.flush().unwrap();
        assert_eq!(frame_count(writer.get_ref()), 1);
        writer.flush().unwrap();
        assert_eq!(frame_count(writer.get_ref()), 1);
        writer.write_all(b" second").unwrap();
        let wire = writer.into_inner().unwrap();
        assert_eq!(frame_count(&wire), 2);

        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        let mut restored = Vec::new();
        reader.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, b"first second");
    }

    #[test]
    fn writer_on_existing_session() {
        let config = SessionConfig::new(Algorithm::Lz4);
        let session = Session::new(config).unwrap();
        let mut writer = CompressorWriter::with_session(Vec::new(), 2048, session).unwrap();
        writer.write_all(&text_bytes(10_000)).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.session().telemetry().frames_written, 5);
        writer.close().unwrap();
        assert!(!writer.session().is_active());
    }

// # ✅ 2. skip / available

    #[test]
    fn skip_and_available() {
        let data = text_bytes(10_000);
        let config = SessionConfig::default();
        let wire = compress_stream(&data, 4096, config);

        let mut reader = DecompressorReader::with_buffer_size(&wire[..], 4096, config).unwrap();
        assert_eq!(reader.available().unwrap(), 0);
        assert_eq!(reader.skip(-5).unwrap(), 0);
        assert_eq!(reader.skip(0).unwrap(), 0);

        assert_eq!(reader.skip(100).unwrap(), 100);
        assert_eq!(reader.available().unwrap(), 4096 - 100);

        // crosses a frame boundary
        assert_eq!(reader.skip(5000).unwrap(), 5000);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, &data[5100..]);

        assert_eq!(reader.skip(10).unwrap(), 0);
    }

    #[test]
    fn skip_past_end_reports_what_was_there() {
        let data = text_bytes(3000);
        let config = SessionConfig::default();
        let wire = compress_stream(&data, 1024, config);
        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        assert_eq!(reader.skip(1_000_000).unwrap(), 3000);
    }

    #[test]
    fn mark_reset_unsupported() {
        let config = SessionConfig::default();
        let mut reader = DecompressorReader::new(&b""[..], config).unwrap();
        assert!(!reader.mark_supported());
        reader.mark(100);
        assert!(reader.reset().is_err());
    }

// # ❌ 3. Malformed streams

    #[test]
    fn truncated_payload_is_unexpected_eof() {
        let config = SessionConfig::default();
        let wire = compress_stream(&text_bytes(3000), 1024, config);
        let cut = &wire[..wire.len() - 1];

        let mut reader = DecompressorReader::new(cut, config).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn truncated_header_is_unexpected_eof() {
        let config = SessionConfig::default();
        let mut wire = compress_stream(&text_bytes(500), 1024, config);
        wire.extend_from_slice(&[0, 0]);

        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn oversized_frame_is_invalid_data() {
        let config = SessionConfig::default();
        let wire = [0xFFu8, 0xFF, 0xFF, 0xFF, 1, 2, 3];
        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        let mut buf = [0u8; 8];
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn zero_length_frames_are_skipped() {
        let config = SessionConfig::default();
        let data = text_bytes(2000);
        let body = compress_stream(&data, 1024, config);

        let mut wire = encode_frame(&[]).unwrap();
        wire.extend_from_slice(&body);
        wire.extend(encode_frame(&[]).unwrap());

        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        let mut restored = Vec::new();
        reader.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn corrupt_payload_is_invalid_data() {
        let config = SessionConfig::new(Algorithm::Zstd);
        let wire = encode_frame(b"not a zstd frame at all").unwrap();
        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

// # ✅ 4. Close semantics

    #[test]
    fn reader_close_is_idempotent_and_final() {
        let config = SessionConfig::default();
        let wire = compress_stream(&text_bytes(100), 1024, config);
        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        reader.close().unwrap();
        reader.close().unwrap();
        assert!(reader.is_closed());
        assert!(!reader.session().is_active());

        let mut buf = [0u8; 4];
        assert!(reader.read(&mut buf).is_err());
        assert!(reader.available().is_err());
        assert!(reader.skip(1).is_err());
        assert!(reader.read_byte().is_err());
    }

    #[test]
    fn writer_close_is_idempotent_and_final() {
        let config = SessionConfig::default();
        let mut writer = CompressorWriter::new(Vec::new(), config).unwrap();
        writer.write_all(b"payload").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());
        assert_eq!(frame_count(writer.get_ref()), 1);
        assert!(writer.write(b"more").is_err());
        assert!(writer.flush().is_err());
    }

    #[test]
    fn zero_buffer_size_rejected() {
        let config = SessionConfig::default();
        let err = CompressorWriter::with_buffer_size(Vec::new(), 0, config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = DecompressorReader::with_buffer_size(&b""[..], 0, config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn drop_closes_writer() {
        let config = SessionConfig::default();
        let mut sink = Vec::new();
        {
            let mut writer = CompressorWriter::new(&mut sink, config).unwrap();
            writer.write_all(b"dropped before close").unwrap();
        }
        let mut reader = DecompressorReader::new(&sink[..], config).unwrap();
        let mut restored = Vec::new();
        reader.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, b"dropped before close");
    }

    #[test]
    fn drop_closes_reader_mid_stream() {
        let config = SessionConfig::default();
        let wire = compress_stream(&text_bytes(10_000), 1024, config);

        let mut reader = DecompressorReader::with_buffer_size(&wire[..], 1024, config).unwrap();
        let mut head = [0u8; 16];
        reader.read_exact(&mut head).unwrap();
        assert_eq!(&head[..], &text_bytes(16)[..]);
        drop(reader);

        // closed readers drop quietly too
        let mut reader = DecompressorReader::new(&wire[..], config).unwrap();
        reader.close().unwrap();
        assert!(reader.is_closed());
        drop(reader);
    }
}
