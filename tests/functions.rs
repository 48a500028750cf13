mod common;

#[cfg(test)]
mod function_tests {
    use crate::common::session;

    #[test]
    fn calling_the_clock_builtin() {
        let mut lox = session();

        lox.must_evaluate_to("clock();", "1.66246623E9");
        lox.must_evaluate_to("var time = clock; time();", "1.66246623E9");
        lox.must_evaluate_to("clock", "fn <clock>");
    }

    #[test]
    fn function_with_parameters() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun sayHi(first, last) { print \"Hi, \" + first + \" \" + last + \"!\"; } sayHi(\"Dear\", \"Reader\");",
            "nil",
        );
        lox.must_have_printed(&["Hi, Dear Reader!"]);
    }

    #[test]
    fn returning_from_a_function() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun count(n) { while (n < 100) { if (n == 3) return n; print n; n = n + 1; } } count(1);",
            "3",
        );
        lox.must_have_printed(&["1", "2"]);
    }

    #[test]
    fn functions_without_a_value_return_nil() {
        let mut lox = session();

        lox.must_evaluate_to("fun explicitReturn() { return; } explicitReturn();", "nil");
        lox.must_evaluate_to("fun noop() {} var returned = noop(); returned;", "nil");
    }

    #[test]
    fn recursion() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun fib(n) { if (n <= 1) return n; return fib(n-2)+fib(n-1); } fib(10);",
            "55",
        );
        lox.must_evaluate_to("for (var i = 0; i < 12; i = i + 1) { print fib(i); }", "");
        lox.must_have_printed(&["0", "1", "1", "2", "3", "5", "8", "13", "21", "34", "55", "89"]);
    }

    #[test]
    fn closures_keep_their_own_state() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun makeCounter() { var i = 0; fun count() { i = i + 1; print i; } return count; } \
             var counter = makeCounter(); counter(); counter();",
            "nil",
        );
        lox.must_have_printed(&["1", "2"]);

        lox.must_evaluate_to("var other = makeCounter(); other(); counter();", "nil");
        lox.must_have_printed(&["1", "2", "1", "3"]);
    }

    #[test]
    fn closures_capture_the_binding_in_scope_at_declaration() {
        let mut lox = session();

        let source = r#"var a = "global";
{
  fun showA() {
    print a;
  }

  showA();
  var a = "block";
  showA();
  print a;
}"#;

        lox.must_evaluate_to(source, "");
        lox.must_have_printed(&["global", "global", "block"]);
    }

    #[test]
    fn parameters_and_body_locals_are_separate_scopes() {
        let mut lox = session();

        lox.must_evaluate_to(
            "fun f(a) { var b = a + 1; var a = b * 10; return a; } f(1);",
            "20",
        );
    }

    #[test]
    fn anonymous_functions() {
        let mut lox = session();

        let source = r#"fun thrice(fn) {
  for (var i = 1; i <= 3; i = i + 1) {
    fn(i);
  }
}

thrice(fun (a) {
  print a;
});"#;

        lox.must_evaluate_to(source, "nil");
        lox.must_evaluate_to("var p = fun (a) { print a; }; p(10);", "nil");
        lox.must_evaluate_to("p;", "fn <anonymous>");
        lox.must_evaluate_to("fun (x) { return x * 2; };", "fn <anonymous>");
        lox.must_have_printed(&["1", "2", "3", "10"]);
    }

    #[test]
    fn function_values_display_their_name() {
        let mut lox = session();

        lox.must_evaluate_to("fun named() {} named;", "fn <named>");
        lox.must_evaluate_to("print named;", "");
        lox.must_have_printed(&["fn <named>"]);
    }

    #[test]
    fn wrong_number_of_arguments() {
        let mut lox = session();

        lox.must_fail_execution(
            "fun tooManyArgs() {} tooManyArgs(1, 2, 3);",
            "Expected 0 arguments but got 3.\n[line 1]",
        );
        lox.must_fail_execution(
            "fun notEnoughArgs(first, second, third) {} notEnoughArgs(1);",
            "Expected 3 arguments but got 1.\n[line 1]",
        );
        lox.must_fail_execution("clock(1);", "Expected 0 arguments but got 1.\n[line 1]");
    }

    #[test]
    fn only_functions_and_classes_are_callable() {
        let mut lox = session();

        lox.must_fail_execution("\"not a function\"();", "Can only call functions and classes.\n[line 1]");
        lox.must_fail_execution("var x = 1;\nx();", "Can only call functions and classes.\n[line 2]");
    }

    #[test]
    fn more_than_255_arguments() {
        let mut lox = session();

        let args: Vec<String> = (0..=255).map(|i| format!("arg{}", i)).collect();
        let source = format!("fun someFunction() {{}} someFunction({});", args.join(", "));

        lox.must_fail_parsing(&source, "[line 1] Error at 'arg255': Can't have more than 255 arguments.");
    }

    #[test]
    fn more_than_255_parameters() {
        let mut lox = session();

        let params: Vec<String> = (0..=255).map(|i| format!("param{}", i)).collect();
        let source = format!("fun someFunction({}) {{}}", params.join(", "));

        lox.must_fail_parsing(&source, "[line 1] Error at 'param255': Can't have more than 255 parameters.");
    }

    #[test]
    fn return_at_top_level() {
        let mut lox = session();

        lox.must_fail_resolving("return nil;", "[line 1] Error at return: Can't return from top-level code.");
    }
}
