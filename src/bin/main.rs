fn main() {
    spammer::main();
}
