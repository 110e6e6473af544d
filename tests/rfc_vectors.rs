use snsotp::{Otp, create_code, time_interval};

/// "12345678901234567890" in Base32
const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

#[test]
fn rfc4226_appendix_d() {
    let expected = [
        "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583", "399871",
        "520489",
    ];

    for (counter, code) in expected.iter().enumerate() {
        assert_eq!(
            create_code(RFC_SECRET, counter as i64).unwrap(),
            *code,
            "counter {counter}"
        );
    }
}

#[test]
fn rfc6238_appendix_b_sha1_last_six_digits() {
    let expected = [
        (59, "287082"),
        (1_111_111_109, "081804"),
        (1_111_111_111, "050471"),
        (1_234_567_890, "005924"),
        (2_000_000_000, "279037"),
        (20_000_000_000, "353130"),
    ];

    for (time, code) in expected {
        assert_eq!(create_code(RFC_SECRET, time_interval(time)).unwrap(), code, "time {time}");

        let mut otp = Otp::totp(RFC_SECRET).with_window(0);
        assert!(otp.verify_code_at(code, time).unwrap(), "time {time}");
    }
}

#[test]
fn hotp_walks_the_rfc_sequence() {
    let mut otp = Otp::hotp_at(RFC_SECRET, 0).with_window(0);

    for code in ["755224", "287082", "359152"] {
        assert!(otp.verify_code_at(code, 0).unwrap());
    }
    assert_eq!(otp.counter(), Some(3));

    // skipping ahead needs a window
    assert!(!otp.verify_code_at("254676", 0).unwrap());
    assert_eq!(otp.counter(), Some(4));

    let mut otp = otp.with_window(2);
    assert!(otp.verify_code_at("287922", 0).unwrap());
    assert_eq!(otp.counter(), Some(7));
}

#[test]
fn scenario_window_of_one_around_interval_1000() {
    const SECRET: &str = "JBSWY3DPEHPK3PXP";
    let t = 1000 * 30 + 17;
    assert_eq!(time_interval(t), 1000);

    let current = create_code(SECRET, 1000).unwrap();
    let previous = create_code(SECRET, 999).unwrap();
    let too_old = create_code(SECRET, 998).unwrap();

    let mut otp = Otp::totp(SECRET).with_window(1);
    assert!(otp.verify_code_at(&current, t).unwrap());
    assert!(otp.verify_code_at(&previous, t).unwrap());
    assert!(!otp.verify_code_at(&too_old, t).unwrap());
}
