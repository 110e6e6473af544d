use snsotp::{Otp, create_code, current_interval, new_secret};

fn main() {
    let secret = new_secret().unwrap();

    let interval = current_interval().unwrap();
    let code = create_code(&secret, interval).unwrap();

    let mut totp = Otp::totp(secret.clone());
    if totp.verify_code(&code).unwrap() {
        println!("success  : {code}");
    } else {
        println!("fail: this branch will not be executed");
    }
    println!("remaining: {}s", totp.ttl().unwrap());
    println!("uri      : {}", totp.create_uri());

    let mut hotp = Otp::hotp(secret).with_window(2);
    let ahead = hotp.clone().create_hotp_code(3).unwrap();
    println!("hotp 3   : {ahead}");
    println!("accepted : {}", hotp.verify_code(&ahead).unwrap());
    println!("counter  : {:?}", hotp.counter());
}
