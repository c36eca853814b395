fn main() {
    // ESP-IDF environment is only needed for the device build; host tests
    // compile without the toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
