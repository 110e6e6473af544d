use proptest::prelude::*;
use snsotp::{CODE_LENGTH, Error, Otp, create_code, time_interval};

fn secret_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<u8>(), 1..40)
        .prop_map(|bytes| data_encoding::BASE32_NOPAD.encode(&bytes))
}

proptest! {
    #[test]
    fn code_is_six_ascii_digits(secret in secret_strategy(), interval in any::<i64>()) {
        let code = create_code(&secret, interval).unwrap();
        prop_assert_eq!(code.len(), CODE_LENGTH);
        prop_assert!(code.bytes().all(|b| b.is_ascii_digit()));
        prop_assert_eq!(code, create_code(&secret, interval).unwrap());
    }

    #[test]
    fn totp_accepts_its_own_code(
        secret in secret_strategy(),
        now in 0u64..4_000_000_000,
        window in 0u32..4,
    ) {
        let code = create_code(&secret, time_interval(now)).unwrap();
        let mut otp = Otp::totp(secret).with_window(window);
        prop_assert!(otp.verify_code_at(&code, now).unwrap());
    }

    #[test]
    fn hotp_counter_lands_after_match(
        secret in secret_strategy(),
        start in 0u64..1_000_000,
        window in 0u32..5,
        ahead in 0u32..5,
    ) {
        prop_assume!(ahead <= window);
        let target = start + u64::from(ahead);
        let code = create_code(&secret, target as i64).unwrap();

        let mut otp = Otp::hotp_at(secret, start).with_window(window);
        prop_assert!(otp.verify_code_at(&code, 0).unwrap());
        prop_assert_eq!(otp.counter(), Some(target + 1));
    }

    #[test]
    fn wrong_length_is_rejected(code in "[0-9]{0,5}|[0-9]{7,10}", hotp in any::<bool>()) {
        let mut otp = if hotp {
            Otp::hotp_at("JBSWY3DPEHPK3PXP", 3)
        } else {
            Otp::totp("JBSWY3DPEHPK3PXP")
        };
        let result = otp.verify_code_at(&code, 0);
        prop_assert!(matches!(result, Err(Error::InvalidCodeLength(n)) if n == code.len()));
    }
}
