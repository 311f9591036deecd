fn main() {
    // ESP-IDF link arguments are only needed for the firmware image; host
    // test builds skip embuild entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
