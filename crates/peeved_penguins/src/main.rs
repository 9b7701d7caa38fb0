fn main() {
    peeved_penguins::run();
}
