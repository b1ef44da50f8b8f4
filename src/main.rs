fn main() -> std::io::Result<()> {
    patient_intake_lib::run()
}
