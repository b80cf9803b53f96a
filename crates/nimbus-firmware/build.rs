//! Bakes the Wi-Fi credentials and cloud URL from `.env` into the binary.

const BAKED_VARS: [&str; 3] = ["NIMBUS_WIFI_SSID", "NIMBUS_WIFI_PASSWORD", "NIMBUS_CLOUD_URL"];

fn main() {
    println!("cargo:rerun-if-changed=.env");

    // A missing .env is fine when the variables come from the environment
    let _ = dotenvy::dotenv();

    for name in BAKED_VARS {
        println!("cargo:rerun-if-env-changed={name}");
        match std::env::var(name) {
            Ok(value) => println!("cargo:rustc-env={name}={value}"),
            Err(_) => panic!("{name} must be set in .env or the environment"),
        }
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
