//! Built-in prompt templates, registered by name in `PromptRenderer`.

pub const SYNTH_SYSTEM: &str = "synth_system";
pub const SYNTH_INITIAL: &str = "synth_initial";
pub const SYNTH_REFINE: &str = "synth_refine";
pub const SYNTH_CORRECTION: &str = "synth_correction";
pub const GUESS_SYSTEM: &str = "guess_system";
pub const GUESS_TURN: &str = "guess_turn";
pub const GUESS_CORRECTION: &str = "guess_correction";

pub const BUILTIN: &[(&str, &str)] = &[
    (SYNTH_SYSTEM, SYNTH_SYSTEM_TEMPLATE),
    (SYNTH_INITIAL, SYNTH_INITIAL_TEMPLATE),
    (SYNTH_REFINE, SYNTH_REFINE_TEMPLATE),
    (SYNTH_CORRECTION, SYNTH_CORRECTION_TEMPLATE),
    (GUESS_SYSTEM, GUESS_SYSTEM_TEMPLATE),
    (GUESS_TURN, GUESS_TURN_TEMPLATE),
    (GUESS_CORRECTION, GUESS_CORRECTION_TEMPLATE),
];

const SYNTH_SYSTEM_TEMPLATE: &str = "You are an expert user of the Yosys open synthesis suite. \
You write Yosys scripts and fix them until they run cleanly. \
Reply with Yosys commands only, one per line. \
Do not add explanations or markdown formatting.";

const SYNTH_INITIAL_TEMPLATE: &str = r#"Write a Yosys synthesis script for this design.

- Verilog source: {{verilog_path}}
- SDC constraints: {{sdc_path}}
- Netlist to write: {{output_file}}

The script should read the design, pick the top module, synthesize and optimize it,
report statistics and write the synthesized netlist to the file above.

Example of the expected shape:
read_verilog counter.v
synth -top counter
opt
write_verilog counter_synthesized_netlist.v
stat"#;

const SYNTH_REFINE_TEMPLATE: &str = r#"Round {{round}}: the previous Yosys script failed.

Previous script:
{{previous_script}}

Execution log:
{{failure_log}}

Write a corrected script for the same design.

- Verilog source: {{verilog_path}}
- SDC constraints: {{sdc_path}}
- Netlist to write: {{output_file}}

Fix the problems shown in the log. Reply with Yosys commands only, one per line."#;

const SYNTH_CORRECTION_TEMPLATE: &str = r#"{{base}}

Your last reply could not be used ({{reason}}).
Reply with a valid Yosys script made of commands such as read_verilog, synth and write_verilog."#;

const GUESS_SYSTEM_TEMPLATE: &str = "You are playing a number guessing game. \
A secret number between {{min}} and {{max}} has been chosen. \
Answer every turn with a single number and nothing else.";

const GUESS_TURN_TEMPLATE: &str = r#"{{#if previous}}Your guess of {{previous}} was too {{direction}}. Guess a number between {{low}} and {{high}}.{{else}}I'm thinking of a number between {{low}} and {{high}}. Make your first guess!{{/if}}"#;

const GUESS_CORRECTION_TEMPLATE: &str = r#"{{base}}

Your last reply could not be used ({{reason}}). Respond with only a number between {{low}} and {{high}}."#;
