mod common;

#[cfg(test)]
mod statement_tests {
    use crate::common::session;

    #[test]
    fn variable_declarations() {
        let mut lox = session();

        lox.must_evaluate_to("var a = 1; a;", "1");
        lox.must_evaluate_to("var a1_ = 1; a1_;", "1");
        lox.must_evaluate_to("var b = 2 + 3; b;", "5");
        lox.must_evaluate_to("var c = 0; var d = c; d;", "0");
        lox.must_evaluate_to("var e = 10; 5 * e;", "50");
    }

    #[test]
    fn globals_can_be_redeclared() {
        let mut lox = session();

        lox.must_evaluate_to("var a = 1; var a = 2; a;", "2");
        lox.must_evaluate_to("var a = a + 1; a;", "3");
    }

    #[test]
    fn variables_persist_between_runs() {
        let mut lox = session();

        lox.must_evaluate_to("var a = 1; a;", "1");
        lox.must_evaluate_to("a;", "1");
        lox.must_evaluate_to("a = a + 1;", "2");
        lox.must_evaluate_to("a", "2");
    }

    #[test]
    fn initialising_a_declared_variable() {
        let mut lox = session();

        lox.must_evaluate_to("var a; a = 1; a;", "1");
    }

    #[test]
    fn printing() {
        let mut lox = session();

        lox.must_evaluate_to("print 1;", "");
        lox.must_evaluate_to("print 2 + 3;", "");
        lox.must_evaluate_to("var a = 1; print a;", "");
        lox.must_evaluate_to("print \"no quotes\";", "");
        lox.must_evaluate_to("print clock;", "");
        lox.must_have_printed(&["1", "5", "1", "no quotes", "fn <clock>"]);
    }

    #[test]
    fn chained_assignment() {
        let mut lox = session();

        lox.must_evaluate_to("var a; var b; a = b = 1; print a; print b;", "");
        lox.must_have_printed(&["1", "1"]);
    }

    #[test]
    fn blocks() {
        let mut lox = session();

        lox.must_evaluate_to("{}", "");
        lox.must_evaluate_to("{ var a = 0; a; }", "0");
        lox.must_evaluate_to("var a = 10; { 5 * a; }", "50");
        lox.must_evaluate_to("var b = 5; { var b = 10; b + 1; }", "11");
        lox.must_evaluate_to("b;", "5");
    }

    #[test]
    fn assigning_an_outer_variable_from_a_block() {
        let mut lox = session();

        lox.must_evaluate_to("var a = 1; { var b = 2; { a = a + b; } } a;", "3");
    }

    #[test]
    fn assigning_an_undeclared_variable() {
        let mut lox = session();

        lox.must_fail_execution("a = 1;", "Undefined variable `a`.\n[line 1]");
        lox.must_fail_execution("\nprint nope;", "Undefined variable `nope`.\n[line 2]");
    }

    #[test]
    fn reading_an_uninitialised_variable() {
        let mut lox = session();

        lox.must_fail_execution(
            "var uninitialised; print uninitialised;",
            "Uninitialised variable `uninitialised`\n[line 1]",
        );
        lox.must_fail_execution(
            "var uninitialised; print 1 + uninitialised;",
            "Uninitialised variable `uninitialised`\n[line 1]",
        );
        lox.must_fail_execution(
            "{ var local; print local; }",
            "Uninitialised variable `local`\n[line 1]",
        );
    }

    #[test]
    fn print_needs_an_expression() {
        let mut lox = session();

        lox.must_fail_parsing("print;", "[line 1] Error at ';': Expected expression.");
    }

    #[test]
    fn parser_recovers_after_invalid_statements() {
        let mut lox = session();

        lox.must_fail_parsing(
            "var missingSemicolon = 1 print missingSemicolon; +notUnary",
            "[line 1] Error at 'print': Expect ';' after variable declaration\n\
             [line 1] Error at '+': Expected expression.",
        );
    }

    #[test]
    fn invalid_assignment_target() {
        let mut lox = session();

        lox.must_fail_parsing("var a = 1; a + 1 = 2;", "[line 1] Error at '=': Invalid assignment target.");
    }

    #[test]
    fn nothing_runs_after_a_runtime_error() {
        let mut lox = session();

        lox.must_fail_execution("print 1; print nil + nil; print 2;", "Operand must be a string or a number\n[line 1]");
        lox.must_have_printed(&["1"]);
    }

    #[test]
    fn nothing_runs_when_resolution_fails() {
        let mut lox = session();

        lox.must_fail_resolving(
            "print 1; { var unused = 2; }",
            "[line 1] Error at unused: Variable is never used.",
        );
        lox.must_have_printed(&[]);
    }
}
