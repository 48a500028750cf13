mod common;

#[cfg(test)]
mod control_flow_tests {
    use crate::common::session;

    #[test]
    fn if_statement() {
        let mut lox = session();

        lox.must_evaluate_to("if (true) print 1;", "");
        lox.must_evaluate_to("if (false) print 2;", "");
        lox.must_evaluate_to("if (true) print 3; else print 30;", "");
        lox.must_evaluate_to("if (false) print 4; else print 40;", "");
        lox.must_have_printed(&["1", "3", "40"]);
    }

    #[test]
    fn else_binds_to_the_nearest_if() {
        let mut lox = session();

        lox.must_evaluate_to("if (true) if (false) print 1; else print 2;", "");
        lox.must_have_printed(&["2"]);
    }

    #[test]
    fn if_yields_the_taken_branch() {
        let mut lox = session();

        lox.must_evaluate_to("if (true) 1; else -1;", "1");
        lox.must_evaluate_to("if (nil) 1; else -1;", "-1");
        lox.must_evaluate_to("if (false) 1;", "");
    }

    #[test]
    fn logical_operators_return_an_operand() {
        let mut lox = session();

        lox.must_evaluate_to("\"hi\" or 2;", "\"hi\"");
        lox.must_evaluate_to("nil or \"yes\";", "\"yes\"");
        lox.must_evaluate_to("nil and \"yes\";", "nil");
        lox.must_evaluate_to("\"yes\" and nil;", "nil");
        lox.must_evaluate_to("1 and 2 or 3;", "2");
    }

    #[test]
    fn or_short_circuits() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun debug(value) { print value; return value; } debug(true) or debug(false);",
            "true",
        );
        lox.must_have_printed(&["true"]);
    }

    #[test]
    fn and_short_circuits() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun debug(value) { print value; return value; } debug(false) and debug(true);",
            "false",
        );
        lox.must_have_printed(&["false"]);
    }

    #[test]
    fn while_statement() {
        let mut lox = session();

        lox.must_evaluate_to("var i = 5; while (i > 0) print i = i - 1;", "");
        lox.must_have_printed(&["4", "3", "2", "1", "0"]);
    }

    #[test]
    fn while_statement_needs_a_body() {
        let mut lox = session();

        lox.must_fail_parsing("while (false)", "[line 1] Error at end: Expected expression.");
    }

    #[test]
    fn for_statement() {
        let mut lox = session();

        lox.must_evaluate_to("for (var i = 3; i > 0; i = i - 1) print i;", "");
        lox.must_have_printed(&["3", "2", "1"]);
    }

    #[test]
    fn for_clauses_are_optional() {
        let mut lox = session();

        lox.must_evaluate_to("var i = 2; for (; i > 0; i = i - 1) print i;", "");
        lox.must_evaluate_to("var j; for (j = 2; j > 0; j = j - 1) print j;", "");
        lox.must_evaluate_to("for (var k = 2; ; k = k - 1) { if (k <= 0) break; print k; }", "");
        lox.must_evaluate_to("for (var m = 2; m > 0;) print m = m - 1;", "");
        lox.must_have_printed(&["2", "1", "2", "1", "2", "1", "1", "0"]);
    }

    #[test]
    fn for_loop_variable_is_scoped_to_the_loop() {
        let mut lox = session();

        lox.must_fail_execution(
            "for (var i = 0; i < 1; i = i + 1) {} i;",
            "Undefined variable `i`.\n[line 1]",
        );
    }

    #[test]
    fn break_leaves_the_loop() {
        let mut lox = session();

        lox.must_evaluate_to("while (true) break;", "");
        lox.must_evaluate_to("var i = 0; for (; i > 0; i = i + 1) break; i;", "0");
    }

    #[test]
    fn break_out_of_nested_blocks() {
        let mut lox = session();

        let source = r#"var worked = "yes";
for (var i = 0; i < 10; i = i + 1) {
  if (true) {
    if (false) {
       worked = "no";
    } else {
       break;
       worked = "no";
    }
    worked = "no";
  }

  worked = "no";
}
worked;"#;

        lox.must_evaluate_to(source, "\"yes\"");
    }

    #[test]
    fn break_only_leaves_the_innermost_loop() {
        let mut lox = session();

        let source = r#"var i = 0; var j = 0;
for (; i < 5; i = i + 1) {
  for (;; j = j + 1) {
    if (j > 1) break;
  }
}
print i;
print j;
"#;

        lox.must_evaluate_to(source, "");
        lox.must_have_printed(&["5", "2"]);
    }

    #[test]
    fn break_outside_a_loop() {
        let mut lox = session();

        lox.must_fail_parsing("break;", "[line 1] Error at ';': 'break' not inside a loop.");
        lox.must_fail_parsing("if (true) break;", "[line 1] Error at ';': 'break' not inside a loop.");
        lox.must_fail_parsing("{ break; }", "[line 1] Error at ';': 'break' not inside a loop.");
    }

    #[test]
    fn break_does_not_cross_a_function_boundary() {
        let mut lox = session();

        lox.must_fail_parsing(
            "while (true) { fun f() { break; } f(); }",
            "[line 1] Error at ';': 'break' not inside a loop.",
        );
    }

    #[test]
    fn return_leaves_a_loop_inside_a_function() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun first() { while (true) { for (;;) { return \"out\"; } } } first();",
            "\"out\"",
        );
    }
}
