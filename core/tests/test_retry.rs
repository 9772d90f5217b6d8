// Hardware retry and fallback policy, driven by the emulated accelerator:
//
// * busy responses within the retry budget succeed on the device
// * exhausted retries are a hard error in HARDWARE mode
// * exhausted retries fall back to software in AUTO mode
// * a missing device degrades AUTO to software-only

#[cfg(test)]
mod tests {
    use qat_core::codec::{Algorithm, EmulatedAccelerator, Mode, NativeStatus};
    use qat_core::session::{Session, SessionBuilder};
    use qat_core::QatError;

    fn sample() -> Vec<u8> {
        b"retry me ".repeat(400)
    }

    fn session(mode: Mode, retries: u32, busy: u32) -> Session {
        SessionBuilder::new()
            .algorithm(Algorithm::Lz4)
            .mode(mode)
            .retry_count(retries)
            .accelerator(Box::new(EmulatedAccelerator::with_busy_responses(busy)))
            .build()
            .unwrap()
    }

    fn compress(session: &mut Session, data: &[u8]) -> Result<Vec<u8>, QatError> {
        let mut out = vec![0u8; session.max_compressed_length(data.len())?];
        let n = session.compress(data, &mut out)?;
        out.truncate(n);
        Ok(out)
    }

// # ✅ 1. Busy within budget

    #[test]
    fn hardware_retries_until_device_accepts() {
        let mut s = session(Mode::Hardware, 2, 2);
        let data = sample();
        let packed = compress(&mut s, &data).unwrap();

        let snap = s.telemetry();
        assert_eq!(snap.retries, 2);
        assert_eq!(snap.hardware_calls, 1);
        assert_eq!(snap.fallbacks, 0);

        let mut restored = vec![0u8; data.len()];
        s.decompress(&packed, &mut restored).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn zero_length_destination_never_reaches_device() {
        let mut s = session(Mode::Hardware, 3, 2);
        let data = sample();
        let mut dst = vec![0u8; s.max_compressed_length(data.len()).unwrap()];
        let err = s.compress_range(&data, 0, data.len(), &mut dst, 0, 0).unwrap_err();
        assert!(matches!(err, QatError::InvalidArgument(_)));

        let snap = s.telemetry();
        assert_eq!(snap.retries, 0);
        assert_eq!(snap.hardware_calls, 0);

        // the device still owes both busy responses
        compress(&mut s, &data).unwrap();
        assert_eq!(s.telemetry().retries, 2);
    }

// # ❌ 2. Exhaustion in HARDWARE mode

    #[test]
    fn hardware_busy_exhaustion_is_error() {
        let mut s = session(Mode::Hardware, 2, 3);
        let err = compress(&mut s, &sample()).unwrap_err();
        assert!(matches!(err, QatError::Native(NativeStatus::Busy)));
        assert_eq!(s.telemetry().retries, 2);
        assert_eq!(s.bytes_written().unwrap(), 0);

        // the busy budget is spent, the next call goes through
        assert!(compress(&mut s, &sample()).is_ok());
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let mut s = session(Mode::Hardware, 0, 1);
        assert!(matches!(compress(&mut s, &sample()), Err(QatError::Native(NativeStatus::Busy))));
        assert_eq!(s.telemetry().retries, 0);
    }

// # ✅ 3. Fallback in AUTO mode

    #[test]
    fn auto_falls_back_to_software() {
        let mut s = session(Mode::Auto, 1, u32::MAX);
        let data = sample();
        let packed = compress(&mut s, &data).unwrap();

        let snap = s.telemetry();
        assert_eq!(snap.retries, 1);
        assert_eq!(snap.fallbacks, 1);
        assert_eq!(snap.software_calls, 1);
        assert_eq!(snap.hardware_calls, 0);

        let mut restored = vec![0u8; data.len()];
        s.decompress(&packed, &mut restored).unwrap();
        assert_eq!(restored, data);
        assert_eq!(s.telemetry().fallbacks, 2);
    }

    #[test]
    fn auto_without_device_is_software_only() {
        let mut s = SessionBuilder::new()
            .mode(Mode::Auto)
            .accelerator(Box::new(EmulatedAccelerator::unavailable()))
            .build()
            .unwrap();
        assert!(!s.uses_hardware());

        let data = sample();
        let packed = compress(&mut s, &data).unwrap();
        let mut restored = vec![0u8; data.len()];
        s.decompress(&packed, &mut restored).unwrap();
        assert_eq!(restored, data);

        let snap = s.telemetry();
        assert_eq!(snap.software_calls, 2);
        assert_eq!(snap.fallbacks, 0);
    }

    #[test]
    fn hardware_output_decodes_in_software() {
        let data = sample();
        let mut hw = session(Mode::Hardware, 0, 0);
        let packed = compress(&mut hw, &data).unwrap();
        hw.end().unwrap();

        let mut sw = SessionBuilder::new().algorithm(Algorithm::Lz4).build().unwrap();
        let mut restored = vec![0u8; data.len()];
        sw.decompress(&packed, &mut restored).unwrap();
        assert_eq!(restored, data);
    }
}
