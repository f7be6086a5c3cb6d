fn main() {
    // ESP-IDF sysenv propagation is only needed when building for the
    // xtensa target; host-target test builds skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
